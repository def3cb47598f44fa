//! `deploy-pages`: build the site and publish `dist` to the pages branch.

use std::process::ExitCode;

use pages_deploy::config::PipelineVariant;

fn main() -> ExitCode {
    pages_deploy::cli::main(PipelineVariant::PagesBranch)
}
