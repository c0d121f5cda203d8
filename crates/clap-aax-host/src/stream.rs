//! `clap_ostream` / `clap_istream` over Rust byte buffers

use clap_sys::stream::{clap_istream, clap_ostream};
use std::ffi::c_void;
use std::marker::PhantomData;
use std::slice;

/// Output stream appending to a `Vec<u8>`.
pub(crate) struct OutputStream<'a> {
    stream: clap_ostream,
    _sink: PhantomData<&'a mut Vec<u8>>,
}

impl<'a> OutputStream<'a> {
    pub(crate) fn new(sink: &'a mut Vec<u8>) -> Self {
        Self {
            stream: clap_ostream {
                ctx: sink as *mut Vec<u8> as *mut c_void,
                write: Some(ostream_write),
            },
            _sink: PhantomData,
        }
    }

    pub(crate) fn as_raw(&self) -> *const clap_ostream {
        &self.stream
    }
}

unsafe extern "C" fn ostream_write(
    stream: *const clap_ostream,
    buffer: *const c_void,
    size: u64,
) -> i64 {
    if stream.is_null() || (buffer.is_null() && size > 0) {
        return -1;
    }
    if size == 0 {
        return 0;
    }
    let sink = &mut *((*stream).ctx as *mut Vec<u8>);
    let data = slice::from_raw_parts(buffer as *const u8, size as usize);
    sink.extend_from_slice(data);
    size as i64
}

struct ReadCursor<'a> {
    data: &'a [u8],
    position: usize,
}

/// Input stream reading from a byte slice.
pub(crate) struct InputStream<'a> {
    stream: clap_istream,
    _cursor: Box<ReadCursor<'a>>,
}

impl<'a> InputStream<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        let mut cursor = Box::new(ReadCursor { data, position: 0 });
        let stream = clap_istream {
            ctx: &mut *cursor as *mut ReadCursor<'a> as *mut c_void,
            read: Some(istream_read),
        };
        Self {
            stream,
            _cursor: cursor,
        }
    }

    pub(crate) fn as_raw(&self) -> *const clap_istream {
        &self.stream
    }
}

unsafe extern "C" fn istream_read(stream: *const clap_istream, buffer: *mut c_void, size: u64) -> i64 {
    if stream.is_null() || (buffer.is_null() && size > 0) {
        return -1;
    }
    let cursor = &mut *((*stream).ctx as *mut ReadCursor);
    let remaining = cursor.data.len() - cursor.position;
    let to_read = (size as usize).min(remaining);
    if to_read == 0 {
        return 0;
    }

    let source = &cursor.data[cursor.position..cursor.position + to_read];
    let dest = slice::from_raw_parts_mut(buffer as *mut u8, to_read);
    dest.copy_from_slice(source);
    cursor.position += to_read;
    to_read as i64
}
