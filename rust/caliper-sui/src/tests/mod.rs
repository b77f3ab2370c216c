// Tests module
// Lifecycle: coordinator setup through worker execution against a scripted node
