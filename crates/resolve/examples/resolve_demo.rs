use resolve::{resolve, Field, ModelDescriptor, PartialConfig};

fn hosted_models() -> Vec<ModelDescriptor> {
    vec![ModelDescriptor {
        model: "llama-text-embed-v2".into(),
        kind: "embed".into(),
        vector_type: Some("dense".into()),
        default_dimension: Some(1024),
        supported_dimensions: vec![384, 512, 768, 1024, 2048],
        supported_metrics: vec!["cosine".into(), "dotproduct".into()],
        ..Default::default()
    }]
}

fn main() {
    let partial = PartialConfig {
        name: Field::Explicit("docs".into()),
        model: Field::Explicit("default".into()),
        cloud: Field::Explicit("gcp".into()),
        ..Default::default()
    };

    let resolved = resolve(partial, &hosted_models());

    match resolved.require_topology() {
        Ok(topology) => println!("topology: {topology}"),
        Err(err) => eprintln!("cannot create index: {err}"),
    }
    for (name, value) in resolved.inferred_fields() {
        println!("  {name} inferred as {value}");
    }
    match serde_json::to_string_pretty(&resolved) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("serialize failed: {err}"),
    }
}
