mod common;
mod officers;
mod service;
mod withdrawals;
