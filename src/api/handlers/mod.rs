pub mod external;
pub mod groups;
pub mod health;
