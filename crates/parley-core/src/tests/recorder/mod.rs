mod machine;
mod state;
