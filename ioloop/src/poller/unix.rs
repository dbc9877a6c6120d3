use libc::{
    F_GETFL, F_SETFL, O_NONBLOCK, SHUT_RD, SHUT_RDWR, SHUT_WR, c_int, close, fcntl, fd_set,
    nfds_t, poll, pollfd, read, select, shutdown, suseconds_t, time_t, timeval, write,
};
use std::net::Shutdown;
use std::os::fd::RawFd;
use std::{io, mem, ptr};

use crate::time::Interval;

/// Exclusive upper bound on descriptors accepted by `select(2)`.
pub(crate) const FD_SETSIZE: usize = libc::FD_SETSIZE as usize;

/// Reads from a descriptor into the given buffer.
///
/// Returns the number of bytes read; `Ok(0)` is end of file.
pub(crate) fn sys_read(fd: RawFd, buffer: &mut [u8]) -> io::Result<usize> {
    let n = unsafe { read(fd, buffer.as_mut_ptr() as *mut _, buffer.len()) };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

/// Writes the buffer to a descriptor.
///
/// Returns the number of bytes written.
pub(crate) fn sys_write(fd: RawFd, buffer: &[u8]) -> io::Result<usize> {
    let n = unsafe { write(fd, buffer.as_ptr() as *const _, buffer.len()) };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

/// Closes a descriptor.
pub(crate) fn sys_close(fd: RawFd) {
    unsafe { close(fd) };
}

/// Shuts down one or both directions of a socket.
pub(crate) fn sys_shutdown(fd: RawFd, how: Shutdown) -> io::Result<()> {
    let how = match how {
        Shutdown::Read => SHUT_RD,
        Shutdown::Write => SHUT_WR,
        Shutdown::Both => SHUT_RDWR,
    };

    let rc = unsafe { shutdown(fd, how) };
    if rc < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Puts a descriptor in non-blocking mode.
pub(crate) fn sys_set_nonblocking(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { fcntl(fd, F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if flags & O_NONBLOCK != 0 {
        return Ok(());
    }

    let rc = unsafe { fcntl(fd, F_SETFL, flags | O_NONBLOCK) };
    if rc < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

/// Waits on `fds` with `poll(2)`.
///
/// Returns the number of entries with a non-zero `revents`.
pub(crate) fn sys_poll(fds: &mut [pollfd], timeout: Interval) -> io::Result<usize> {
    let n = unsafe {
        poll(
            fds.as_mut_ptr(),
            fds.len() as nfds_t,
            timeout.as_poll_millis(),
        )
    };

    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}

/// Returns an empty `fd_set`.
pub(crate) fn fd_set_empty() -> fd_set {
    unsafe {
        let mut set: fd_set = mem::zeroed();
        libc::FD_ZERO(&mut set);
        set
    }
}

/// Adds `fd` to `set`. `fd` must be below [`FD_SETSIZE`].
pub(crate) fn fd_set_insert(set: &mut fd_set, fd: RawFd) {
    debug_assert!(fd >= 0 && (fd as usize) < FD_SETSIZE);
    unsafe { libc::FD_SET(fd, set) };
}

/// Returns `true` if `fd` is in `set`. `fd` must be below [`FD_SETSIZE`].
pub(crate) fn fd_set_contains(set: &fd_set, fd: RawFd) -> bool {
    debug_assert!(fd >= 0 && (fd as usize) < FD_SETSIZE);
    unsafe { libc::FD_ISSET(fd, set) }
}

/// Waits with `select(2)`.
///
/// `nfds` is the highest descriptor plus one. With `nfds == 0` no set is
/// passed and the call only sleeps.
pub(crate) fn sys_select(
    nfds: c_int,
    read_set: &mut fd_set,
    write_set: &mut fd_set,
    timeout: Interval,
) -> io::Result<usize> {
    let mut tv = timeout.as_micros().map(|micros| timeval {
        tv_sec: (micros / 1_000_000) as time_t,
        tv_usec: (micros % 1_000_000) as suseconds_t,
    });
    let tv_ptr = tv.as_mut().map_or(ptr::null_mut(), |tv| tv as *mut timeval);

    let (read_ptr, write_ptr) = if nfds > 0 {
        (read_set as *mut fd_set, write_set as *mut fd_set)
    } else {
        (ptr::null_mut(), ptr::null_mut())
    };

    let n = unsafe { select(nfds, read_ptr, write_ptr, ptr::null_mut(), tv_ptr) };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}
