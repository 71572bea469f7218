use std::ffi::{CStr, CString};
use std::path::PathBuf;

use crate::execution::ExecutionResult;
use crate::models::CoreError;

/// Credentials for running a child process as another account.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Identity {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub home: Option<PathBuf>,
}

/// Resolves user and group names (or numeric ids). A user without an
/// explicit group runs with that user's primary group.
pub(crate) fn resolve(user: Option<&str>, group: Option<&str>) -> ExecutionResult<Option<Identity>> {
    if user.is_none() && group.is_none() {
        return Ok(None);
    }

    let mut identity = Identity::default();

    if let Some(user) = user {
        let entry = lookup_user(user)?;
        identity.uid = Some(entry.uid);
        identity.gid = entry.gid;
        identity.home = entry.home;
    }

    if let Some(group) = group {
        identity.gid = Some(lookup_group(group)?);
    }

    Ok(Some(identity))
}

struct UserEntry {
    uid: u32,
    gid: Option<u32>,
    home: Option<PathBuf>,
}

fn lookup_user(name: &str) -> ExecutionResult<UserEntry> {
    let numeric = name.parse::<libc::uid_t>().ok();
    let passwd = match numeric {
        Some(uid) => unsafe { libc::getpwuid(uid) },
        None => {
            let c_name = to_c_string(name, "user")?;
            unsafe { libc::getpwnam(c_name.as_ptr()) }
        }
    };

    if passwd.is_null() {
        // A bare uid is still usable without a passwd entry.
        return match numeric {
            Some(uid) => Ok(UserEntry {
                uid,
                gid: None,
                home: None,
            }),
            None => Err(CoreError::invalid_input(format!("unknown user '{name}'"))),
        };
    }

    // SAFETY: non-null result of getpwnam/getpwuid, read before any other
    // passwd lookup can overwrite the static buffer.
    let passwd = unsafe { &*passwd };
    let home = if passwd.pw_dir.is_null() {
        None
    } else {
        let dir = unsafe { CStr::from_ptr(passwd.pw_dir) };
        Some(PathBuf::from(dir.to_string_lossy().into_owned()))
    };

    Ok(UserEntry {
        uid: passwd.pw_uid,
        gid: Some(passwd.pw_gid),
        home,
    })
}

fn lookup_group(name: &str) -> ExecutionResult<u32> {
    if let Ok(gid) = name.parse::<libc::gid_t>() {
        return Ok(gid);
    }

    let c_name = to_c_string(name, "group")?;
    let group = unsafe { libc::getgrnam(c_name.as_ptr()) };
    if group.is_null() {
        return Err(CoreError::invalid_input(format!("unknown group '{name}'")));
    }

    // SAFETY: non-null result of getgrnam.
    Ok(unsafe { (*group).gr_gid })
}

fn to_c_string(name: &str, what: &str) -> ExecutionResult<CString> {
    CString::new(name)
        .map_err(|_| CoreError::invalid_input(format!("{what} name must not contain NUL bytes")))
}
