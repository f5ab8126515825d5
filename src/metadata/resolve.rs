use url::Url;

/// Make an `<img src>` absolute against the page it was found on.
///
/// Best effort only:
/// - anything starting with `http` or `//` is returned as is (plain prefix
///   check, `//cdn/x.png` stays protocol-relative)
/// - `/x.png` is joined to scheme and host
/// - `x.png` is joined to the directory of the page path
///
/// `../` segments, queries and fragments in `src` are not interpreted.
pub fn resolve_image_url(src: &str, base: &Url) -> String {
    if src.starts_with("http") || src.starts_with("//") {
        return src.to_string();
    }

    let scheme = base.scheme();
    let host = match (base.host_str(), base.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    if src.starts_with('/') {
        return format!("{scheme}://{host}{src}");
    }

    let dir = directory_of(base.path());
    format!("{scheme}://{host}{dir}/{src}")
}

/// Path minus its last segment, without the trailing slash. The root and
/// the current-directory sentinel both come back empty.
fn directory_of(path: &str) -> &str {
    let dir = match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => ".",
    };

    if dir == "." {
        ""
    } else {
        dir
    }
}
