#![no_std]

mod error;
mod flag;
mod seek;
mod stat;

pub use self::{
    error::Error,
    flag::OpenFlag,
    seek::{SEEK_CUR, SEEK_END, SEEK_SET, Whence},
    stat::{InodeKind, Stat},
};
