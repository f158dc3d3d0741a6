//! Open-file descriptor limit.

/// Raise the soft `RLIMIT_NOFILE` to the hard maximum. Best-effort: returns
/// the limit in effect afterwards, or `None` when it cannot be read.
#[cfg(unix)]
pub fn raise_fd_limit() -> Option<u64> {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    // SAFETY: getrlimit only writes into the struct we pass.
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) } != 0 {
        tracing::debug!(error = %std::io::Error::last_os_error(), "getrlimit failed");
        return None;
    }
    if limit.rlim_cur >= limit.rlim_max {
        return Some(limit.rlim_cur as u64);
    }

    let raised = libc::rlimit {
        rlim_cur: limit.rlim_max,
        rlim_max: limit.rlim_max,
    };
    // SAFETY: setrlimit only reads the struct we pass.
    if unsafe { libc::setrlimit(libc::RLIMIT_NOFILE, &raised) } != 0 {
        tracing::debug!(
            error = %std::io::Error::last_os_error(),
            current = limit.rlim_cur as u64,
            "could not raise open file limit"
        );
        return Some(limit.rlim_cur as u64);
    }
    tracing::debug!(
        from = limit.rlim_cur as u64,
        to = limit.rlim_max as u64,
        "raised open file limit"
    );
    Some(limit.rlim_max as u64)
}

#[cfg(not(unix))]
pub fn raise_fd_limit() -> Option<u64> {
    None
}
