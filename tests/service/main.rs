mod audit_trail;
mod concurrency;
mod rotation_sweep;
