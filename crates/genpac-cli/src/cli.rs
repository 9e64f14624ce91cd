use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "genpac")]
#[command(version)]
#[command(about = "Generate a PAC file from gfwlist and user rules")]
pub struct Args {
    /// Proxy string written into the PAC file, e.g. "SOCKS5 127.0.0.1:1080; SOCKS 127.0.0.1:1080"
    #[arg(short, long)]
    pub proxy: Option<String>,

    /// URL of the base64-encoded gfwlist
    #[arg(long)]
    pub gfwlist_url: Option<String>,

    /// Proxy used to fetch gfwlist: "PROXY|SOCKS5 [user:pwd@]host:port"
    #[arg(long)]
    pub gfwlist_proxy: Option<String>,

    /// Local gfwlist copy, used when the online fetch fails
    #[arg(long)]
    pub gfwlist_local: Option<PathBuf>,

    /// Refresh the local gfwlist copy after a successful fetch [default: true]
    #[arg(long, value_name = "BOOL")]
    pub update_gfwlist_local: Option<bool>,

    /// Inline user rule (repeatable)
    #[arg(long = "user-rule", value_name = "RULE")]
    pub user_rules: Vec<String>,

    /// User rule file (repeatable, comma separated)
    #[arg(long = "user-rule-from", value_name = "FILE", value_delimiter = ',')]
    pub user_rule_from: Vec<PathBuf>,

    /// JSON config file; command line options take precedence, `--compress false` included
    #[arg(short, long)]
    pub config_from: Option<PathBuf>,

    /// Output file; the PAC is printed to stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compact rules and use the minified template
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub compress: Option<bool>,

    /// Wrap the PAC script in a base64 envelope
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub base64: Option<bool>,

    /// Reduce rules to registrable domains
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub precise: Option<bool>,

    /// Public suffix list file for precise mode (built-in list when omitted)
    #[arg(long)]
    pub psl_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeatable_and_delimited_options() {
        let args = Args::parse_from([
            "genpac",
            "-p",
            "SOCKS5 127.0.0.1:1080",
            "--user-rule",
            "||a.com",
            "--user-rule",
            "@@||b.com",
            "--user-rule-from",
            "one.txt,two.txt",
            "--precise",
        ]);
        assert_eq!(args.proxy.as_deref(), Some("SOCKS5 127.0.0.1:1080"));
        assert_eq!(args.user_rules, vec!["||a.com", "@@||b.com"]);
        assert_eq!(
            args.user_rule_from,
            vec![PathBuf::from("one.txt"), PathBuf::from("two.txt")]
        );
        assert_eq!(args.precise, Some(true));
        assert_eq!(args.compress, None);
        assert_eq!(args.update_gfwlist_local, None);
    }

    #[test]
    fn parses_explicit_bool() {
        let args = Args::parse_from(["genpac", "--update-gfwlist-local", "false"]);
        assert_eq!(args.update_gfwlist_local, Some(false));
    }

    #[test]
    fn switches_take_optional_value() {
        let args = Args::parse_from(["genpac", "--compress", "--base64", "false", "-o", "out.pac"]);
        assert_eq!(args.compress, Some(true));
        assert_eq!(args.base64, Some(false));
        assert_eq!(args.output, Some(PathBuf::from("out.pac")));
    }
}
