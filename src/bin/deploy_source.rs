//! `deploy-source`: build the site, push the full source tree, create the
//! repository if needed and enable pages publishing.

use std::process::ExitCode;

use pages_deploy::config::PipelineVariant;

fn main() -> ExitCode {
    pages_deploy::cli::main(PipelineVariant::FullSource)
}
