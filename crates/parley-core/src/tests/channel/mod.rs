mod handle;
mod payload;
mod resolver;
