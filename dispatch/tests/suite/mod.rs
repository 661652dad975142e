mod lifecycle;
mod persistence;
mod properties;
mod voting;
