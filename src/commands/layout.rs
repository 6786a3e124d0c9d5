use super::{EXECUTION_ERROR, SUCCESS};
use crate::cli::LayoutArgs;
use crate::logic::features::{FittedArtifacts, LayoutInfo};

pub fn execute(args: LayoutArgs) -> i32 {
    let info = match FittedArtifacts::load(&args.artifacts) {
        Ok(artifacts) => artifacts.layout().info(),
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXECUTION_ERROR;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&info) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return EXECUTION_ERROR;
            }
        }
    } else {
        print!("{}", render(&info));
    }
    SUCCESS
}

fn render(info: &LayoutInfo) -> String {
    let mut out = format!(
        "Feature layout v{}  hash={:#010x}  width={}\n",
        info.version, info.hash, info.feature_count
    );
    for span in &info.blocks {
        out.push_str(&format!(
            "  {:<18} [{}..{})\n",
            span.block.as_str(),
            span.start,
            span.start + span.width
        ));
    }
    for (index, name) in info.feature_names.iter().enumerate() {
        out.push_str(&format!("  {:>4}  {}\n", index, name));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::tests::sample_artifacts;

    #[test]
    fn test_render_lists_blocks_and_columns() {
        let info = sample_artifacts().layout().info();
        let text = render(&info);
        assert!(text.starts_with(&format!("Feature layout v{}", info.version)));
        assert!(text.contains("time_delta"));
        assert_eq!(text.lines().count(), 1 + info.blocks.len() + info.feature_count);
    }
}
