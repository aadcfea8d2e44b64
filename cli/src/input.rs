use std::{
    env,
    io::{self, IsTerminal as _},
    path::Path,
};

use anyhow::{anyhow, Error};

/// Disables the check that input arrives either via a path or via stdin.
///
/// Reading from a terminal would hang, so by default this is an error. In some contexts, e.g.
/// testing, stdin is never a terminal and the check gets in the way.
pub const ENV_KEY_DISABLE_CHECK: &str = "COALSFS_ALLOW_STDIN";

/// Checks that input is provided either as a path or via stdin, but not both.
pub fn check<P>(path: Option<P>) -> Result<(), Error>
where
    P: AsRef<Path>,
{
    if env::var(ENV_KEY_DISABLE_CHECK).is_ok() {
        return Ok(());
    }

    match (path, io::stdin().is_terminal()) {
        (Some(_), false) => Err(anyhow!("received input both via file and stdin")),
        (None, true) => Err(anyhow!("received no input via file or stdin")),
        _ => Ok(()),
    }
}
