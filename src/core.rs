pub mod coordinates;
pub mod export;
pub mod prices;
pub mod run;
pub mod zone;
