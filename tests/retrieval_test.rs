use leakgraph::document::DocumentType;
use leakgraph::loader::{Dataset, LoadLimits};
use leakgraph::{
    format_context, DocumentSynthesizer, GraphBuilder, GraphStore, HashingEmbedder,
    HybridRetriever, RetrievedDocument,
};
use std::sync::Arc;

/// One hub entity with eight officers and two addresses, plus a few
/// unconnected entities from a second leak.
fn hub_dataset() -> Dataset {
    let mut entities = String::from("node_id,name,jurisdiction,company_type,sourceID\n");
    entities.push_str("1,HUB HOLDINGS LTD,Samoa,Company,Panama Papers\n");
    for i in 2..=5 {
        entities.push_str(&format!("{},SATELLITE {} SA,Panama,Trust,Paradise Papers\n", i, i));
    }

    let mut officers = String::from("node_id,name,countries,sourceID\n");
    let mut relationships = String::from("node_id_start,node_id_end,rel_type,sourceID\n");
    for i in 0..8 {
        officers.push_str(&format!("{},OFFICER {},Malta,Panama Papers\n", 100 + i, i));
        relationships.push_str(&format!("{},1,officer_of,Panama Papers\n", 100 + i));
    }

    let addresses = "node_id,address,countries,sourceID\n200,1 HARBOUR RD,Samoa,Panama Papers\n201,2 HARBOUR RD,Samoa,Panama Papers\n";
    relationships.push_str("1,200,registered_address,Panama Papers\n");
    relationships.push_str("1,201,registered_address,Panama Papers\n");
    // Dangling
    relationships.push_str("1,999,registered_address,Panama Papers\n");

    Dataset::from_readers(
        Some(entities.as_bytes()),
        Some(officers.as_bytes()),
        Some(addresses.as_bytes()),
        Some(relationships.as_bytes()),
        &LoadLimits::unlimited(),
    )
}

fn find_entity<'a>(results: &'a [RetrievedDocument], entity_id: &str) -> &'a RetrievedDocument {
    results
        .iter()
        .find(|d| d.text("entity_id") == Some(entity_id))
        .unwrap()
}

fn retriever(graph: GraphStore) -> HybridRetriever {
    HybridRetriever::new(graph, Arc::new(HashingEmbedder::new(256).unwrap()))
}

#[tokio::test]
async fn test_never_more_than_k_results() {
    let (graph, _) = GraphBuilder::new().build(&hub_dataset());
    let total = DocumentSynthesizer::default().synthesize(&graph).len();
    let retriever = retriever(graph);

    for k in [0, 1, 3, total - 1, total, total + 5, 100] {
        let results = retriever.retrieve("offshore holdings in Samoa", k).await.unwrap();
        assert!(results.len() <= k);
        assert_eq!(results.len(), k.min(total));
    }
}

#[tokio::test]
async fn test_connected_to_is_capped() {
    let (graph, _) = GraphBuilder::new().build(&hub_dataset());
    let hub = graph.node_id("1").unwrap();
    assert_eq!(graph.degree(hub), 10);

    let retriever = retriever(graph);
    let results = retriever.retrieve("HUB HOLDINGS LTD Samoa", 20).await.unwrap();
    let hub_doc = find_entity(&results, "1");

    assert_eq!(hub_doc.integer("network_degree"), Some(10));
    let connected = hub_doc.text("connected_to").unwrap();
    let named: Vec<&str> = connected.split("; ").collect();
    assert!(named.len() <= 5);
    // Neighbors are ordered by name: addresses ("1 ...", "2 ...") sort before officers
    assert_eq!(
        named,
        vec!["Address: Samoa", "Address: Samoa", "Officer: OFFICER 0", "Officer: OFFICER 1", "Officer: OFFICER 2"]
    );
}

#[tokio::test]
async fn test_rebuild_is_idempotent() {
    let dataset = hub_dataset();
    let (first, _) = GraphBuilder::new().build(&dataset);
    let (second, _) = GraphBuilder::new().build(&dataset);

    let synthesizer = DocumentSynthesizer::default();
    assert_eq!(synthesizer.synthesize(&first), synthesizer.synthesize(&second));

    let a = retriever(first);
    let b = retriever(second);
    let from_a = a.retrieve("satellite trust Panama", 4).await.unwrap();
    let from_b = b.retrieve("satellite trust Panama", 4).await.unwrap();
    assert_eq!(from_a, from_b);
}

#[tokio::test]
async fn test_investigation_documents_per_source() {
    let (graph, _) = GraphBuilder::new().build(&hub_dataset());
    let documents = DocumentSynthesizer::default().synthesize(&graph);

    let investigations: Vec<_> = documents
        .iter()
        .filter(|d| d.doc_type() == Some(DocumentType::Investigation))
        .collect();
    assert_eq!(investigations.len(), 2);
    assert_eq!(investigations[0].text("source"), Some("Panama Papers"));
    assert_eq!(investigations[1].integer("entity_count"), Some(4));
    assert!(investigations[1]
        .content
        .contains("Key jurisdictions include: Panama (4 entities)."));
}

#[tokio::test]
async fn test_zero_documents_returns_empty() {
    let (graph, _) = GraphBuilder::new().build(&Dataset::default());
    let retriever = retriever(graph);

    let results = retriever.retrieve("anything at all", 4).await.unwrap();
    assert!(results.is_empty());
    assert!(retriever.health().await.index_ready);
    assert_eq!(format_context(&results), "");
}

#[tokio::test]
async fn test_replaced_graph_needs_rebuild_for_enrichment() {
    let dataset = hub_dataset();
    let (graph, _) = GraphBuilder::new().build(&dataset);
    let retriever = retriever(graph);
    retriever.rebuild_index().await.unwrap();

    let (fresh, _) = GraphBuilder::new().build(&dataset);
    retriever.replace_graph(fresh).await;
    assert!(retriever.health().await.index_stale);

    let stale = retriever.retrieve("HUB HOLDINGS LTD Samoa", 20).await.unwrap();
    assert_eq!(stale.len(), 15);
    assert!(stale.iter().all(|d| d.text("connected_to").is_none()));

    retriever.rebuild_index().await.unwrap();
    let fresh = retriever.retrieve("HUB HOLDINGS LTD Samoa", 20).await.unwrap();
    assert_eq!(find_entity(&fresh, "1").integer("network_degree"), Some(10));
    assert!(!retriever.health().await.index_stale);
}
