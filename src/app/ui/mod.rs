mod details;
mod panels;
