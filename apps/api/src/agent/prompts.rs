// Resume agent prompt templates.
// All prompts for the structuring and revision calls are defined here.

pub const STRUCTURE_SYSTEM: &str = "\
You are a precise resume data extractor. \
Parse the raw text of an uploaded resume into structured JSON. \
You MUST respond with valid JSON only — no markdown fences, no explanations. \
Preserve the candidate's wording; never invent experience, dates, or skills \
that are not present in the source text.";

pub const STRUCTURE_PROMPT: &str = r#"Parse the following resume text into a structured JSON object.

RESUME TEXT:
{document_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "contact": {
    "name": "string", "email": "string" | null, "phone": "string" | null,
    "location": "string" | null, "links": ["string"]
  },
  "summary": "string" | null,
  "experience": [
    {
      "company": "string", "role": "string",
      "start": "string" | null, "end": "string" | null,
      "location": "string" | null,
      "bullets": ["string"]
    }
  ],
  "education": [
    {
      "institution": "string", "degree": "string" | null,
      "field": "string" | null, "start": "string" | null, "end": "string" | null
    }
  ],
  "skills": [{"category": "string", "items": ["string"]}],
  "extras": [{"title": "string", "items": ["string"]}],
  "parse_confidence": number
}

RULES:
1. Keep sections in the order they appear in the source document.
2. Put anything that does not fit the named sections under "extras".
3. Set parse_confidence between 0.0 and 1.0 based on how cleanly the text mapped.
4. Return ONLY the JSON object — nothing else, no code fences."#;

pub const REVISE_SYSTEM: &str = "\
You are an expert resume editor. \
Given a structured resume and an instruction, return the revised resume plus \
a short explanation of what you changed and why. \
You MUST respond with valid JSON only — no markdown fences, no explanations \
outside the JSON. Never fabricate experience the candidate does not have; \
rephrase, reorder, emphasize, and trim instead.";

pub const REVISE_PROMPT: &str = r#"Revise the resume below according to the instruction.

CURRENT RESUME (JSON):
{resume_json}

INSTRUCTION:
{instruction}

TARGET JOB URL (may be empty):
{job_url}

OUTPUT SCHEMA (return exactly this structure):
{
  "resume": { /* the full revised resume, same schema as the input */ },
  "message": "string — a concise explanation of the changes, written to the candidate"
}

RULES:
1. Return the COMPLETE revised resume, not a patch.
2. If a job URL is given, tailor wording toward that role but stay truthful.
3. The "message" should read like a diff summary: what changed and why.
4. Return ONLY the JSON object — nothing else, no code fences."#;
