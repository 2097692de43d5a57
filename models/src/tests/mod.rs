mod frame;
mod request_options;
