//! iPXE boot-script endpoint.
//!
//! Scripts are stored as templates next to the OS config trees; rendering
//! fills in the URLs a PXE client should chain to on this server.

use std::sync::Arc;

use axum::extract::{Host, Path, State};
use axum::response::{IntoResponse, Response};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

const TEMPLATE_SUFFIX: &str = ".cfg.tmpl";

/// Device the installer writes to. Matches the disk layout of the machines
/// this server provisions.
const INSTALL_DEV: &str = "/dev/sda";

/// `GET /configs/ipxe/:name`: render the named boot-script template.
pub async fn ipxe_handler(
    State(state): State<Arc<AppState>>,
    Host(host): Host,
    Path(name): Path<String>,
) -> ServerResult<Response> {
    let path = state
        .config
        .config_dir
        .join("ipxe")
        .join(format!("{name}{TEMPLATE_SUFFIX}"));
    let template = match tokio::fs::read_to_string(&path).await {
        Ok(template) => template,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::UnknownTemplate(name));
        }
        Err(err) => return Err(err.into()),
    };

    let rendered = render(&template, &host);
    Ok(rendered.into_response())
}

/// Substitute the template variables a boot script may reference.
fn render(template: &str, host: &str) -> String {
    let image_url = format!("http://{host}/images/coreos");
    let ignition_url = format!("http://{host}/configs/coreos/standard");
    template
        .replace("${IMAGE_URL}", &image_url)
        .replace("${IGNITION_URL}", &ignition_url)
        .replace("${INSTALL_DEV}", INSTALL_DEV)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_variables() {
        let template = "#!ipxe\nkernel ${IMAGE_URL}/kernel ignition.config.url=${IGNITION_URL} dev=${INSTALL_DEV}\n";
        let out = render(template, "pxe.example.net:8086");
        assert_eq!(
            out,
            "#!ipxe\nkernel http://pxe.example.net:8086/images/coreos/kernel \
             ignition.config.url=http://pxe.example.net:8086/configs/coreos/standard dev=/dev/sda\n"
        );
    }

    #[test]
    fn template_without_variables_passes_through() {
        assert_eq!(render("#!ipxe\nexit\n", "h"), "#!ipxe\nexit\n");
    }
}
