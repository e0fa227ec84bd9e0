pub mod component;
pub mod game;
pub mod match_result;
pub mod profile;

pub use component::{Component, ComponentKind, Manufacturer};
pub use game::{Game, GameImage, Genre, Platform, RequirementSet, Tag};
pub use match_result::{Headroom, MatchResult};
pub use profile::HardwareProfile;

pub type ComponentId = i64;
pub type GameId = i64;
pub type GenreId = i64;
pub type UserId = i64;
