pub mod attendance;
pub mod badges;
pub mod filter;
pub mod lifecycle;
pub mod log;
pub mod roster;
