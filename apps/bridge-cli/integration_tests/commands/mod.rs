mod call;
mod helpers;
mod serve;
mod watch;
