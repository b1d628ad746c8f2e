pub const PATHWAY_ORTHO_DISPLAY_VERSION: &str = env!("PATHWAY_ORTHO_DISPLAY_VERSION");
pub const PATHWAY_ORTHO_BUILD_N: &str = env!("PATHWAY_ORTHO_BUILD_N");

pub fn version_cli_text() -> String {
    format!(
        "pathway-ortho {}\nBuild {}\nSBML gene product orthology annotator",
        PATHWAY_ORTHO_DISPLAY_VERSION, PATHWAY_ORTHO_BUILD_N
    )
}
