use jmxmon_common::error::{Result, SpecError};
use jmxmon_common::types::{Credentials, Target};

/// Splits a list on `,`, `;` and whitespace, dropping empty items.
pub fn split_list(value: &str) -> Vec<&str> {
    value
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Lines `list` up with `count` addresses: one item each, or one shared.
fn pair_up<'a>(
    list: Option<&'a str>,
    count: usize,
    field: &'static str,
) -> Result<Vec<Option<&'a str>>> {
    let items = list.map(split_list).unwrap_or_default();
    match items.len() {
        0 => Ok(vec![None; count]),
        1 => Ok(vec![Some(items[0]); count]),
        n if n == count => Ok(items.into_iter().map(Some).collect()),
        found => Err(SpecError::CardinalityMismatch {
            field,
            expected: count,
            found,
        }),
    }
}

/// Builds the target list from the parallel address, name and credential
/// lists.
///
/// # Examples
///
/// ```
/// use jmxmon_agent::targets::parse_targets;
///
/// let targets = parse_targets(Some("shop,billing"), "a:1, b:2", Some("admin"), Some("secret")).unwrap();
/// assert_eq!(targets[1].display_name, "billing-b:2");
/// assert_eq!(targets[1].credentials.as_ref().unwrap().user, "admin");
/// ```
pub fn parse_targets(
    servername: Option<&str>,
    url: &str,
    usr: Option<&str>,
    pwd: Option<&str>,
) -> Result<Vec<Target>> {
    let addresses = split_list(url);
    if addresses.is_empty() {
        return Err(SpecError::MissingAddress);
    }
    let count = addresses.len();
    let names = pair_up(servername, count, "servername")?;
    let users = pair_up(usr, count, "usr")?;
    let passwords = pair_up(pwd, count, "pwd")?;

    Ok(addresses
        .iter()
        .enumerate()
        .map(|(i, address)| {
            let credentials = match (users[i], passwords[i]) {
                (Some(user), Some(password)) => Some(Credentials {
                    user: user.to_string(),
                    password: password.to_string(),
                }),
                _ => None,
            };
            Target::new(address, names[i], credentials)
        })
        .collect())
}
