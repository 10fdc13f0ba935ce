use crate::session::Credentials;
use anyhow::{bail, Result};
use std::io::{BufRead, Write};

pub struct AccountPair {
    pub from: Credentials,
    pub to: Credentials,
}

/// Reads one line, without its trailing `\n` or `\r\n`.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        bail!("Standard input closed before all credentials were entered");
    }
    let trimmed = line.trim_end_matches('\n').trim_end_matches('\r');
    Ok(trimmed.to_string())
}

fn ask<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, label: &str) -> Result<String> {
    write!(writer, "{}: ", label)?;
    writer.flush()?;
    read_line(reader)
}

pub fn read_accounts<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> Result<AccountPair> {
    writeln!(writer, "Valorant Account Settings Copier")?;
    writeln!(writer, "--------------------------------")?;
    let from = Credentials {
        username: ask(reader, writer, "From account login name")?,
        password: ask(reader, writer, "From account login password")?,
    };
    let to = Credentials {
        username: ask(reader, writer, "To account login name")?,
        password: ask(reader, writer, "To account login password")?,
    };
    Ok(AccountPair { from, to })
}

pub fn wait_for_enter<R: BufRead, W: Write>(reader: &mut R, writer: &mut W) -> Result<()> {
    write!(writer, "Press 'Enter' to close...")?;
    writer.flush()?;
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn reads_both_accounts_in_order() {
        let mut input = Cursor::new("alice\r\npa:ss word\r\nbob\nsecret\n");
        let mut output = Vec::new();

        let accounts = read_accounts(&mut input, &mut output).unwrap();

        assert_eq!(accounts.from.username, "alice");
        assert_eq!(accounts.from.password, "pa:ss word");
        assert_eq!(accounts.to.username, "bob");
        assert_eq!(accounts.to.password, "secret");
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.starts_with("Valorant Account Settings Copier\n"));
        assert!(printed.contains("To account login password: "));
    }

    #[test]
    fn last_line_without_newline_is_accepted() {
        let mut input = Cursor::new("alice\npw\nbob\nlast");
        let accounts = read_accounts(&mut input, &mut Vec::new()).unwrap();
        assert_eq!(accounts.to.password, "last");
    }

    #[test]
    fn early_eof_is_an_error() {
        let mut input = Cursor::new("alice\npw\n");
        assert!(read_accounts(&mut input, &mut Vec::new()).is_err());
    }

    #[test]
    fn wait_for_enter_tolerates_closed_input() {
        let mut output = Vec::new();
        wait_for_enter(&mut Cursor::new(""), &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "Press 'Enter' to close...");
    }
}
