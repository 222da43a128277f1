pub mod decode_list;
pub mod watchlist;
pub mod zone;
