mod helpers;
mod payloads;
mod properties;
mod scenarios;
