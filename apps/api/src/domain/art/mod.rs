// Art gallery domain module

#![allow(clippy::module_inception)]

pub mod art;

pub use art::{Art, ArtEdit, NewArt, TagToAdd};
