pub mod deploy_steps;
pub mod registry_steps;
pub mod resource_steps;

/// 步驟間共享值的鍵，避免散落的字串打錯
pub const REGISTRY_SERVER_KEY: &str = "registry_server";
pub const ZIP_PATH_KEY: &str = "zip_path";
pub const BASE_URL_KEY: &str = "base_url";

/// 完整映像位址：<login server>/<name>:<tag>
pub fn image_ref(login_server: &str, name: &str, tag: &str) -> String {
    format!("{}/{}:{}", login_server, name, tag)
}
