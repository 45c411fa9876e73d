use clap::Args;

/// Options for one federated login run.
///
/// The password deliberately has no flag and no environment fallback:
/// either would leak it into shell history or the process list. It is
/// always prompted.
#[derive(Args, Debug, Clone)]
pub struct LoginCommand {
    /// ADFS endpoint to authenticate to, e.g. "fedssoawiew1.clmgmt.entsvcs.com"
    #[arg(short = 'a', long, env = "AUTHENTICATION_URL")]
    pub adfs_endpoint: Option<String>,

    /// Username to login with, e.g. "shortname@clmgmt.entsvcs.com"
    #[arg(short = 'u', long, env = "DXC_FEDSSO_USERNAME")]
    pub username: Option<String>,
}
