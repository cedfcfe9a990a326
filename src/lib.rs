pub mod cat;
pub mod character;
pub mod collaborators;
pub mod constants;
pub mod game;
pub mod letter;
pub mod rng;
pub mod scheduler;
pub mod sequence;
pub mod stage;
pub mod types;
pub mod vector;
