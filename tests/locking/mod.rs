mod lock_contention;
mod locking_required;
