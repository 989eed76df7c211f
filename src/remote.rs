//! Canonical `owner/repo` identities for hosted remotes.
//!
//! SSH (`git@host:owner/repo.git`, `ssh://git@host:22/owner/repo`) and
//! HTTP(S) (`https://host/owner/repo`) spellings of the same remote map to the
//! same identity. Local paths and hosts outside the configured list map to
//! nothing.

/// Canonical `owner/repo` for `url` when it points at one of `hosts`.
#[must_use]
pub fn canonical_identity(url: &str, hosts: &[String]) -> Option<String> {
    let (host, path) = split_host_path(url.trim())?;
    if !hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
        return None;
    }
    owner_repo(path)
}

fn split_host_path(url: &str) -> Option<(&str, &str)> {
    if let Some((scheme, rest)) = url.split_once("://") {
        if !matches!(scheme, "https" | "http" | "ssh" | "git" | "git+ssh") {
            return None;
        }
        let (authority, path) = rest.split_once('/')?;
        let host = strip_port(strip_user(authority));
        return (!host.is_empty()).then_some((host, path));
    }
    // scp-like syntax: [user@]host:owner/repo
    let (authority, path) = url.split_once(':')?;
    if authority.contains('/') || path.starts_with('/') {
        return None;
    }
    let host = strip_user(authority);
    (!host.is_empty()).then_some((host, path))
}

fn strip_user(authority: &str) -> &str {
    authority.rsplit_once('@').map_or(authority, |(_, host)| host)
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

fn owner_repo(path: &str) -> Option<String> {
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut segments = path.split('/');
    let (Some(owner), Some(repo), None) = (segments.next(), segments.next(), segments.next())
    else {
        return None;
    };
    (is_segment(owner) && is_segment(repo)).then(|| format!("{owner}/{repo}"))
}

fn is_segment(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github() -> Vec<String> {
        vec!["github.com".to_string()]
    }

    #[test]
    fn ssh_and_https_forms_agree() {
        let hosts = github();
        let forms = [
            "git@github.com:acme/widget.git",
            "git@github.com:acme/widget",
            "github.com:acme/widget",
            "ssh://git@github.com/acme/widget.git",
            "ssh://git@github.com:22/acme/widget",
            "https://github.com/acme/widget",
            "https://github.com/acme/widget.git",
            "https://github.com/acme/widget/",
            "https://token@github.com/acme/widget.git",
            "http://GitHub.com/acme/widget",
        ];
        for url in forms {
            assert_eq!(
                canonical_identity(url, &hosts).as_deref(),
                Some("acme/widget"),
                "{url}"
            );
        }
    }

    #[test]
    fn foreign_hosts_and_local_paths_have_no_identity() {
        let hosts = github();
        for url in [
            "https://gitlab.example.com/acme/widget.git",
            "/srv/git/widget.git",
            "file:///srv/git/widget.git",
            "../widget",
            "not a url",
            "",
            "https://github.com/acme",
            "https://github.com/acme/widget/tree/main",
            "git@github.com:/acme/widget",
        ] {
            assert_eq!(canonical_identity(url, &hosts), None, "{url}");
        }
    }

    #[test]
    fn extra_hosts_are_honoured() {
        let hosts = vec!["github.com".to_string(), "git.internal".to_string()];
        assert_eq!(
            canonical_identity("git@git.internal:team/tool.git", &hosts).as_deref(),
            Some("team/tool")
        );
    }
}
