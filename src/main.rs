//! Command-line interface for gmlgeom

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use gmlgeom::export::feature_to_json;
#[cfg(feature = "cli")]
use gmlgeom::{GmlParser, NoAnnotations, SchemaIndex, TypeAnnotations};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "gmlgeom")]
#[command(author, version, about = "GML geometry extraction tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the feature tree and geometries from a GML document as JSON
    Extract {
        /// Path to the GML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Path to the XSD schema used for type annotations
        #[arg(short, long, value_name = "SCHEMA")]
        schema: Option<PathBuf>,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the reconstructed WKT geometries of a GML document
    Wkt {
        /// Path to the GML file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Path to the XSD schema used for type annotations
        #[arg(short, long, value_name = "SCHEMA")]
        schema: Option<PathBuf>,
    },

    /// Inspect a schema index and display its declarations
    Inspect {
        /// Path to the XSD schema file
        #[arg(value_name = "SCHEMA")]
        schema: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            file,
            schema,
            pretty,
            output,
        } => cmd_extract(file, schema, pretty, output),
        Commands::Wkt { file, schema } => cmd_wkt(file, schema),
        Commands::Inspect { schema, json } => cmd_inspect(schema, json),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn load_annotations(schema: Option<PathBuf>) -> gmlgeom::Result<Box<dyn TypeAnnotations>> {
    match schema {
        Some(path) => Ok(Box::new(SchemaIndex::from_file(path)?)),
        None => Ok(Box::new(NoAnnotations)),
    }
}

#[cfg(feature = "cli")]
fn cmd_extract(
    file: PathBuf,
    schema: Option<PathBuf>,
    pretty: bool,
    output: Option<PathBuf>,
) -> gmlgeom::Result<()> {
    let xml = fs::read_to_string(&file)?;
    let annotations = load_annotations(schema)?;
    let parser = GmlParser::new(annotations.as_ref());
    let root = parser.parse_str(&xml)?;

    let value = feature_to_json(&root);
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .map_err(|e| gmlgeom::Error::Other(format!("cannot serialize output: {}", e)))?;

    match output {
        Some(path) => fs::write(path, rendered)?,
        None => println!("{}", rendered),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_wkt(file: PathBuf, schema: Option<PathBuf>) -> gmlgeom::Result<()> {
    let xml = fs::read_to_string(&file)?;
    let annotations = load_annotations(schema)?;
    let parser = GmlParser::new(annotations.as_ref());
    let root = parser.parse_str(&xml)?;

    for geometry in root.all_geometries() {
        println!("{}\t{}", geometry.spatial_ref(), geometry.wkt);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_inspect(schema: PathBuf, json: bool) -> gmlgeom::Result<()> {
    let index = SchemaIndex::from_file(schema)?;

    if json {
        let value = serde_json::json!({
            "targetNamespace": index.target_namespace(),
            "statistics": {
                "elements": index.element_count(),
                "attributes": index.attribute_count(),
            },
            "elements": index
                .elements()
                .map(|(qname, type_name)| {
                    serde_json::json!({ "name": qname.to_string(), "type": type_name })
                })
                .collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value)
                .map_err(|e| gmlgeom::Error::Other(format!("cannot serialize output: {}", e)))?
        );
        return Ok(());
    }

    println!("gmlgeom {}", gmlgeom::VERSION);
    println!(
        "Target Namespace: {}",
        index.target_namespace().unwrap_or("(none)")
    );
    println!("Elements: {}", index.element_count());
    println!("Attributes: {}", index.attribute_count());
    for (qname, type_name) in index.elements() {
        println!("  {} : {}", qname, type_name);
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("gmlgeom was built without the 'cli' feature");
}
