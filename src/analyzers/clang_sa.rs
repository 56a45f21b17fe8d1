//! Clang Static Analyzer command construction.
//!
//! Unlike clang-tidy, this family writes its findings itself: the command
//! line directs plist output to the path chosen by the result handler.

use crate::action::BuildAction;
use crate::analyzers::config::AnalyzerConfig;
use std::path::Path;

/// Build the full analyzer command line for one source file.
///
/// `result_file` is where the analyzer writes its plist report.
pub fn construct_cmd(
    source: &Path,
    action: &BuildAction,
    config: &AnalyzerConfig,
    result_file: &Path,
) -> Vec<String> {
    let mut cmd = vec![
        config.binary().to_string_lossy().into_owned(),
        "--analyze".to_string(),
        "-Xclang".to_string(),
        "-analyzer-output=plist".to_string(),
    ];

    // Enabled checkers map to -analyzer-checker, disabled ones to
    // -analyzer-disable-checker, in table order.
    for (name, state) in config.checkers() {
        cmd.push("-Xclang".to_string());
        if state.enabled {
            cmd.push("-analyzer-checker".to_string());
        } else {
            cmd.push("-analyzer-disable-checker".to_string());
        }
        cmd.push("-Xclang".to_string());
        cmd.push(name.clone());
    }

    cmd.extend(config.analyzer_extra_arguments.iter().cloned());
    cmd.push("-o".to_string());
    cmd.push(result_file.to_string_lossy().into_owned());
    cmd.extend(config.compiler_arguments(&action.lang));
    cmd.extend(action.analyzer_options.iter().cloned());
    cmd.push(source.to_string_lossy().into_owned());
    cmd
}
