pub mod i_wh_dump;
pub mod wh_dump;
