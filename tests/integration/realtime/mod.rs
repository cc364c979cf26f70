//! Registry, broadcaster and sweeper working together
