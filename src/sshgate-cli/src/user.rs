//! Name of the account sshgate runs as, for audit lines.

/// Login name from the password database, then `$USER`, then `unknown`.
pub fn current_user() -> String {
    passwd_name()
        .or_else(|| std::env::var("USER").ok().filter(|name| !name.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(unix)]
fn passwd_name() -> Option<String> {
    let uid = unsafe { libc::getuid() };
    let passwd = unsafe { libc::getpwuid(uid) };

    if passwd.is_null() {
        return None;
    }

    unsafe {
        let name = (*passwd).pw_name;
        if name.is_null() {
            return None;
        }
        std::ffi::CStr::from_ptr(name)
            .to_str()
            .ok()
            .map(str::to_string)
    }
}

#[cfg(not(unix))]
fn passwd_name() -> Option<String> {
    None
}
