mod channel;
mod recorder;
mod session;
