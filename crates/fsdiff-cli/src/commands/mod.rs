pub mod compare;
pub mod inspect;
pub mod live;
pub mod scan;
pub mod verify;
