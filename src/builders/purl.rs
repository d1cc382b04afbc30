use packageurl::PackageUrl;

use crate::model::{Component, ExternalReferenceType};

use super::PurlFactory;

const PURL_TYPE: &str = "npm";
const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

pub mod qualifier_names {
    pub const DOWNLOAD_URL: &str = "download_url";
    pub const VCS_URL: &str = "vcs_url";
}

/// Derives `pkg:npm/...` URLs from components.
///
/// At most one qualifier survives: a download URL replaces the VCS URL, and
/// a download URL pointing at the default registry tarball is dropped since
/// the purl already implies it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NpmPurlFactory;

impl PurlFactory for NpmPurlFactory {
    fn make_from_component(
        &self,
        component: &Component,
        sort: bool,
    ) -> Option<PackageUrl<'static>> {
        if component.name.is_empty() {
            return None;
        }

        let mut purl = PackageUrl::new(PURL_TYPE, component.name.clone()).ok()?;
        if let Some(group) = component.group.as_ref().filter(|g| !g.is_empty()) {
            purl.with_namespace(group.clone());
        }
        if let Some(version) = component.version.as_ref().filter(|v| !v.is_empty()) {
            purl.with_version(version.clone());
        }

        let download_url = component
            .external_reference(ExternalReferenceType::Distribution)
            .map(|r| r.url.as_str());
        let vcs_url = component
            .external_reference(ExternalReferenceType::Vcs)
            .map(|r| r.url.as_str());

        let mut qualifiers: Vec<(&'static str, &str)> = Vec::new();
        match download_url {
            Some(url) if is_default_registry_tarball(component, url) => {}
            Some(url) => qualifiers.push((qualifier_names::DOWNLOAD_URL, url)),
            None => {
                if let Some(url) = vcs_url {
                    qualifiers.push((qualifier_names::VCS_URL, url));
                }
            }
        }
        if sort {
            qualifiers.sort_unstable();
        }
        for (key, value) in qualifiers {
            purl.add_qualifier(key, value.to_string()).ok()?;
        }

        Some(purl)
    }
}

fn is_default_registry_tarball(component: &Component, url: &str) -> bool {
    let Some(version) = component.version.as_deref() else {
        return false;
    };
    let full_name = match component.group.as_deref().filter(|g| !g.is_empty()) {
        Some(group) => format!("{}/{}", group, component.name),
        None => component.name.clone(),
    };
    url == format!(
        "{}/{}/-/{}-{}.tgz",
        DEFAULT_REGISTRY, full_name, component.name, version
    )
}

/// Copy of `purl` without qualifiers and subpath.
pub fn shorten(purl: &PackageUrl<'_>) -> Option<PackageUrl<'static>> {
    let mut short = PackageUrl::new(purl.ty().to_string(), purl.name().to_string()).ok()?;
    if let Some(namespace) = purl.namespace() {
        short.with_namespace(namespace.to_string());
    }
    if let Some(version) = purl.version() {
        short.with_version(version.to_string());
    }
    Some(short)
}
