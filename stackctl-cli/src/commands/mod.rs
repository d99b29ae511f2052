pub mod erase;
pub mod install;
pub mod start;
pub mod stop;
