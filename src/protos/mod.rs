//! Wire-level constants of the plain buffer row format.

pub mod plain_buffer;
