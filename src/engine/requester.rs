// Concurrent generation of panorama segments

use super::prompt::segment_prompt;
use super::size::SizeDescriptor;
use crate::collaborators::{AssetFetcher, AssetReference, GenerationRequest, ImageGenerator};
use crate::error::PipelineError;
use futures_util::future::join_all;
use std::sync::Arc;
use stitcher::{EncodedImage, Segment};

/// Issues one generate-then-fetch chain per segment and joins them
#[derive(Clone)]
pub struct SegmentRequester {
    generator: Arc<dyn ImageGenerator>,
    fetcher: Arc<dyn AssetFetcher>,
}

impl SegmentRequester {
    pub fn new(generator: Arc<dyn ImageGenerator>, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self { generator, fetcher }
    }

    /// Request `count` segments concurrently.
    ///
    /// Segment `i` gets a positional prompt and, with a style seed, seed
    /// `style_seed + i`. Results come back in index order. If any chain fails
    /// the whole batch fails; siblings are left to finish and discarded.
    pub async fn request_segments(
        &self,
        base_prompt: &str,
        count: usize,
        size: SizeDescriptor,
        model: &str,
        style_seed: Option<u64>,
    ) -> Result<Vec<Segment>, PipelineError> {
        if count == 0 {
            return Err(PipelineError::InvalidInput(
                "segment count must be at least 1".into(),
            ));
        }

        tracing::info!(
            "Requesting {} segment(s) at {} from model {}",
            count,
            size,
            model
        );

        let chains = (0..count).map(|index| {
            let request = GenerationRequest {
                prompt: segment_prompt(base_prompt, index, count),
                size,
                seed: style_seed.map(|seed| seed.wrapping_add(index as u64)),
                model: model.to_string(),
            };
            self.request_one(index, request)
        });

        let results = join_all(chains).await;

        let mut segments = Vec::with_capacity(count);
        let mut first_error = None;
        for result in results {
            match result {
                Ok(segment) => segments.push(segment),
                Err(e) => {
                    tracing::warn!("{}", e);
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(segments),
        }
    }

    async fn request_one(
        &self,
        index: usize,
        request: GenerationRequest,
    ) -> Result<Segment, PipelineError> {
        let failed = |stage: &str, detail: String| {
            PipelineError::GenerationFailure(format!("segment {} {}: {}", index, stage, detail))
        };

        let reference = self
            .generator
            .generate(&request)
            .await
            .map_err(|e| failed("generation", e.to_string()))?;

        let bytes = match reference {
            AssetReference::Url(url) => self
                .fetcher
                .fetch(&url)
                .await
                .map_err(|e| failed("fetch", e.to_string()))?,
            AssetReference::Inline(bytes) => bytes,
        };

        if let Err(e) = image::guess_format(&bytes) {
            return Err(failed("asset", format!("not a recognizable image ({})", e)));
        }

        tracing::debug!("Segment {} ready ({} bytes)", index, bytes.len());
        Ok(Segment::new(index, EncodedImage::new(bytes)).with_seed(request.seed))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::collaborators::CollaboratorError;
    use async_trait::async_trait;
    use image::{Rgba, RgbaImage};
    use std::sync::Mutex;
    use std::time::Duration;

    pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba(rgba));
        EncodedImage::encode_png(&image).unwrap().as_bytes().to_vec()
    }

    /// Generator returning `asset://<index>` URLs and recording every request.
    /// Earlier segments answer more slowly so completion order is reversed.
    #[derive(Default)]
    pub struct RecordingGenerator {
        pub requests: Mutex<Vec<GenerationRequest>>,
        pub base_url: Option<String>,
        pub fail_index: Option<usize>,
    }

    #[async_trait]
    impl ImageGenerator for RecordingGenerator {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<AssetReference, CollaboratorError> {
            self.requests.lock().unwrap().push(request.clone());
            let index = segment_index(&request.prompt);
            tokio::time::sleep(Duration::from_millis(30 - 10 * index.min(2) as u64)).await;

            if self.fail_index == Some(index) {
                return Err(CollaboratorError::Network("connection reset".into()));
            }
            let base = self.base_url.as_deref().unwrap_or("asset:/");
            Ok(AssetReference::Url(format!("{}/{}", base, index)))
        }
    }

    /// Pull `i` out of "... segment i+1 of n ..."
    pub fn segment_index(prompt: &str) -> usize {
        prompt
            .split("segment ")
            .nth(1)
            .and_then(|rest| rest.split(' ').next())
            .and_then(|n| n.parse::<usize>().ok())
            .map(|n| n - 1)
            .unwrap_or(0)
    }

    /// Fetcher serving a distinct solid tile per URL suffix
    pub struct TileFetcher {
        pub width: u32,
        pub height: u32,
    }

    #[async_trait]
    impl AssetFetcher for TileFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, CollaboratorError> {
            let index: u8 = url.rsplit('/').next().and_then(|n| n.parse().ok()).unwrap_or(0);
            Ok(png(self.width, self.height, [index * 50, 0, 0, 255]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::collaborators::HttpAssetFetcher;
    use crate::collaborators::fetcher::testing::serve_assets;

    fn requester(generator: Arc<RecordingGenerator>) -> SegmentRequester {
        SegmentRequester::new(generator, Arc::new(TileFetcher { width: 4, height: 4 }))
    }

    #[tokio::test]
    async fn test_segments_returned_in_index_order() {
        let generator = Arc::new(RecordingGenerator::default());
        let segments = requester(generator.clone())
            .request_segments("beach", 3, SizeDescriptor::Square256, "comic", None)
            .await
            .unwrap();

        let indices: Vec<usize> = segments.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        // segment i was served tile i, despite later segments finishing first
        for segment in &segments {
            let decoded = segment.image.decode().unwrap();
            assert_eq!(decoded.get_pixel(0, 0)[0], segment.index as u8 * 50);
        }
        assert_eq!(generator.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_style_seed_offsets_per_segment() {
        let generator = Arc::new(RecordingGenerator::default());
        let segments = requester(generator.clone())
            .request_segments("beach", 3, SizeDescriptor::Square512, "sdxl", Some(100))
            .await
            .unwrap();

        let seeds: Vec<Option<u64>> = segments.iter().map(|s| s.seed).collect();
        assert_eq!(seeds, vec![Some(100), Some(101), Some(102)]);

        let requests = generator.requests.lock().unwrap();
        assert!(requests.iter().all(|r| r.model == "sdxl" && r.size == SizeDescriptor::Square512));
        let mut prompts: Vec<&str> = requests.iter().map(|r| r.prompt.as_str()).collect();
        prompts.sort();
        assert_eq!(
            prompts[0],
            "beach, segment 1 of 3, extended view for panorama"
        );
    }

    #[tokio::test]
    async fn test_without_seed_no_seed_sent() {
        let generator = Arc::new(RecordingGenerator::default());
        requester(generator.clone())
            .request_segments("beach", 2, SizeDescriptor::Square256, "comic", None)
            .await
            .unwrap();
        assert!(generator.requests.lock().unwrap().iter().all(|r| r.seed.is_none()));
    }

    #[tokio::test]
    async fn test_one_failed_generation_fails_batch() {
        let generator = Arc::new(RecordingGenerator {
            fail_index: Some(1),
            ..Default::default()
        });
        let err = requester(generator.clone())
            .request_segments("beach", 3, SizeDescriptor::Square256, "comic", None)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::GenerationFailure(_)));
        // siblings were still issued
        assert_eq!(generator.requests.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_http_404_fails_batch() {
        let base = serve_assets(png(4, 4, [1, 2, 3, 255])).await;
        let generator = Arc::new(RecordingGenerator {
            base_url: Some(base),
            ..Default::default()
        });
        let requester = SegmentRequester::new(
            Arc::new(MissingSecond(generator)),
            Arc::new(HttpAssetFetcher::default()),
        );

        let err = requester
            .request_segments("beach", 2, SizeDescriptor::Square256, "comic", None)
            .await
            .unwrap_err();

        match err {
            PipelineError::GenerationFailure(msg) => assert!(msg.contains("404"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_non_image_asset_rejected() {
        struct HtmlFetcher;

        #[async_trait::async_trait]
        impl AssetFetcher for HtmlFetcher {
            async fn fetch(
                &self,
                _url: &str,
            ) -> Result<Vec<u8>, crate::collaborators::CollaboratorError> {
                Ok(b"<html>rate limited</html>".to_vec())
            }
        }

        let requester = SegmentRequester::new(
            Arc::new(RecordingGenerator::default()),
            Arc::new(HtmlFetcher),
        );
        let err = requester
            .request_segments("beach", 1, SizeDescriptor::Square256, "comic", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::GenerationFailure(_)));
    }

    #[tokio::test]
    async fn test_zero_count_rejected() {
        let err = requester(Arc::new(RecordingGenerator::default()))
            .request_segments("beach", 0, SizeDescriptor::Square256, "comic", None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    /// Points segment 1 at the server's 404 route
    struct MissingSecond(Arc<RecordingGenerator>);

    #[async_trait::async_trait]
    impl ImageGenerator for MissingSecond {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<AssetReference, crate::collaborators::CollaboratorError> {
            match self.0.generate(request).await? {
                AssetReference::Url(url) if url.ends_with("/1") => Ok(AssetReference::Url(
                    format!("{}missing", url.trim_end_matches('1')),
                )),
                other => Ok(other),
            }
        }
    }
}
