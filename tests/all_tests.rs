#![allow(bad_style)]

mod png;
