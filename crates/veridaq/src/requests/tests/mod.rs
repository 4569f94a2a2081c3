mod common;
mod gateway;
mod routing;
