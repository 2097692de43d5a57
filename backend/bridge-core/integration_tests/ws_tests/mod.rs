mod bridge;
mod helpers;
mod host;
